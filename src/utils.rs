use std::borrow::Cow;

pub fn make_single_line(s: &str) -> Cow<'_, str> {
    if s.contains(['\r', '\n']) {
        Cow::Owned(s.replace("\r\n", "↵").replace(['\r', '\n'], "↵"))
    } else {
        Cow::Borrowed(s)
    }
}
