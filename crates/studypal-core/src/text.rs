//! Small string helpers shared by the text pipeline and its callers.

/// Uppercase the first character and leave the rest untouched.
pub fn capitalize_first(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_the_first_character_changes() {
    assert_eq!(capitalize_first("hello World"), "Hello World");
    assert_eq!(capitalize_first("ébène"), "Ébène");
    assert_eq!(capitalize_first(""), "");
  }
}
