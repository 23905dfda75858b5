/// Appends `params` to the query string of `url`.
///
/// A `#fragment` is split off first and re-attached after the query.
/// Keys and values are appended verbatim, without percent-encoding.
pub fn append_query_params<'a, I>(url: &str, params: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let (base, fragment) = match url.split_once('#') {
        Some((base, fragment)) => (base, fragment),
        None => (url, ""),
    };

    let mut out = base.to_owned();
    for (key, value) in params {
        match out.find('?') {
            Some(_) if out.ends_with('?') || out.ends_with('&') => {}
            Some(_) => out.push('&'),
            None => out.push('?'),
        }
        out.push_str(key);
        out.push('=');
        out.push_str(value);
    }

    if !fragment.is_empty() {
        out.push('#');
        out.push_str(fragment);
    }

    out
}
