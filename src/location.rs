use url::Url;

/// The address bar: a current URL plus session history.
///
/// `push` extends history, dropping any forward entries. Nothing is reloaded.
pub trait Location {
  fn href(&self) -> &Url;
  fn push(&mut self, url: Url);
  /// Step back one entry. Returns `false` at the start of history.
  fn back(&mut self) -> bool;
  /// Step forward one entry. Returns `false` at the end of history.
  fn forward(&mut self) -> bool;
}

/// In-process history, seeded from the URL the widget was opened with.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
  entries: Vec<Url>,
  index: usize,
}

impl MemoryHistory {
  pub fn new(initial: Url) -> Self {
    Self { entries: vec![initial], index: 0 }
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.entries.len()
  }
}

impl Location for MemoryHistory {
  fn href(&self) -> &Url {
    &self.entries[self.index]
  }

  fn push(&mut self, url: Url) {
    self.entries.truncate(self.index + 1);
    self.entries.push(url);
    self.index += 1;
  }

  fn back(&mut self) -> bool {
    if self.index == 0 {
      return false;
    }
    self.index -= 1;
    true
  }

  fn forward(&mut self) -> bool {
    if self.index + 1 >= self.entries.len() {
      return false;
    }
    self.index += 1;
    true
  }
}

/// First value of query parameter `name`, if any.
pub fn query_param(url: &Url, name: &str) -> Option<String> {
  url.query_pairs().find(|(k, _)| k == name).map(|(_, v)| v.into_owned())
}

/// Copy of `url` with parameter `name` set to `value`, or removed when `None`.
/// Other parameters keep their order.
pub fn with_query_param(url: &Url, name: &str, value: Option<&str>) -> Url {
  let kept: Vec<(String, String)> =
    url.query_pairs().filter(|(k, _)| k != name).map(|(k, v)| (k.into_owned(), v.into_owned())).collect();

  let mut out = url.clone();
  if kept.is_empty() && value.is_none() {
    out.set_query(None);
    return out;
  }
  {
    let mut pairs = out.query_pairs_mut();
    pairs.clear();
    for (k, v) in &kept {
      pairs.append_pair(k, v);
    }
    if let Some(value) = value {
      pairs.append_pair(name, value);
    }
  }
  out
}
