//! Shared HTTP agent configuration and bounded response helpers.

use std::io::{self, Read};
use std::time::Duration;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);
const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Build an agent with consistent timeouts.
///
/// Timeouts surface as transport errors, which callers treat as connectivity
/// failures.
pub(crate) fn agent(
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT))
        .timeout_read(read_timeout.unwrap_or(DEFAULT_READ_TIMEOUT))
        .timeout_write(WRITE_TIMEOUT)
        .build()
}

/// Read a response body into a string, enforcing a maximum byte size.
pub(crate) fn read_body_limited(
    response: ureq::Response,
    max_bytes: usize,
) -> Result<String, String> {
    let bytes = read_response_bytes(response, max_bytes).map_err(|err| err.to_string())?;
    String::from_utf8(bytes).map_err(|err| format!("Response was not UTF-8: {err}"))
}

/// Read a response into memory, enforcing a maximum byte size.
pub(crate) fn read_response_bytes(
    response: ureq::Response,
    max_bytes: usize,
) -> Result<Vec<u8>, io::Error> {
    check_content_length(&response, max_bytes)?;
    let reader = response.into_reader();
    let mut limited = reader.take(max_bytes as u64 + 1);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes)?;
    if bytes.len() > max_bytes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Response exceeded {max_bytes} bytes"),
        ));
    }
    Ok(bytes)
}

fn check_content_length(response: &ureq::Response, max_bytes: usize) -> Result<(), io::Error> {
    let Some(length) = response.header("Content-Length") else {
        return Ok(());
    };
    let Ok(length) = length.parse::<u64>() else {
        return Ok(());
    };
    if length > max_bytes as u64 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Response too large: {length} bytes"),
        ));
    }
    Ok(())
}
