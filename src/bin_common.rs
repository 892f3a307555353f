/// clap value parser for `--top-n`: a positive integer.
pub fn parse_top_n(s: &str) -> Result<u32, String> {
    let n: u32 = s
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| e.to_string())?;
    if n == 0 {
        return Err("must be at least 1".to_string());
    }
    Ok(n)
}
