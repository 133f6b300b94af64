/// Take `n` characters if available, fewer if reaching EOS before that
/// point. Returns true iff (at least) `n` characters were available.
pub fn str_take(s: &str, n: usize) -> (&str, bool) {
    let mut ci = 0;
    for (i, _) in s.char_indices() {
        if ci == n {
            return (&s[0..i], true)
        }
        ci += 1;
    }
    (s, ci == n)
}

/// The first non-empty segment of a URL path, without query string.
/// `"/Home/x?y"` gives `Some("Home")`, `"/"` and `""` give `None`.
pub fn first_path_segment(path: &str) -> Option<&str> {
    let path = match path.find('?') {
        Some(i) => &path[..i],
        None => path
    };
    path.split('/').find(|s| !s.is_empty())
}

/// Split `a.b.c` into its non-empty parts. Empty parts (`a..b`) make
/// the whole path invalid.
pub fn dotted_parts(path: &str) -> Option<Vec<&str>> {
    if path.is_empty() {
        return None
    }
    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        None
    } else {
        Some(parts)
    }
}
