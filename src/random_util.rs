use std::fmt::Write;

/// A 12 character (6 entropy bytes) long hex string useful to tag
/// e.g. error messages for identification.
pub fn randomidstring() -> Result<String, getrandom::Error> {
    let mut buf = [0u8; 6];
    getrandom::getrandom(&mut buf)?;
    let mut s = String::new();
    for byte in buf {
        let _ = write!(&mut s, "{:02X}", byte);
    }
    Ok(s)
}

/// A fresh base64 nonce (16 entropy bytes) for use in a
/// Content-Security-Policy and the matching `nonce` attributes.
pub fn csp_nonce() -> Result<String, getrandom::Error> {
    let mut buf = [0u8; 16];
    getrandom::getrandom(&mut buf)?;
    Ok(base64::encode(buf))
}
