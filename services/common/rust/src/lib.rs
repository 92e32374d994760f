pub mod adapter;
pub mod confidentiality;
pub mod config;
pub mod constant;
pub mod error;
pub mod logging;

use std::sync::Arc;

pub type WebApiPath = String;
pub(crate) type AppLogAlias = Arc<String>;

pub mod util {
    use regex::Regex;

    use crate::error::AppErrorCode;
    use std::result::Result;
    use std::vec::Vec;

    pub fn hex_to_octet(src: &str) -> Result<Vec<u8>, (AppErrorCode, String)> {
        if src.len() % 2 == 0 {
            let mut parse_errors = Vec::new();
            let result = (0..src.len())
                .step_by(2)
                .map(|idx| {
                    if let Some(hx) = src.get(idx..idx + 2) {
                        u8::from_str_radix(hx, 16)
                            .map_err(|_e| format!("parse-char-at-idx: {hx} , {idx}"))
                    } else {
                        Err(format!("no-chars-at-idx: {idx}"))
                    }
                })
                .filter_map(|r| match r {
                    Ok(v) => Some(v),
                    Err(e) => {
                        parse_errors.push(e);
                        None
                    }
                })
                .collect::<Vec<_>>();
            if let Some(d) = parse_errors.pop() {
                Err((AppErrorCode::InvalidInput, d))
            } else {
                Ok(result)
            }
        } else {
            let detail = format!("hex-string-incorrect-size: {src}");
            Err((AppErrorCode::InvalidInput, detail))
        }
    } // end of fn hex_to_octet

    /// loose `local@domain.tld` shape check, no whitespace allowed in any part
    pub fn email_shape_valid(addr: &str) -> bool {
        let addr = addr.trim();
        if addr.is_empty() {
            return false;
        }
        match Regex::new(crate::constant::REGEX_EMAIL_SHAPE) {
            Ok(re) => re.is_match(addr),
            Err(_e) => false,
        }
    }
}
