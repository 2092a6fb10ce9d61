/// Returns the path portion of a request target, without any query string
/// or fragment.
///
/// ```ignore
///  /posts/42?draft=1      /posts/42
///  /posts/42#comments     /posts/42
///  /?a=b#c                /
/// ```
pub fn strip_query(target: &str) -> &str {
    match target.find(|c: char| c == '?' || c == '#') {
        Some(i) => &target[..i],
        None => target,
    }
}
