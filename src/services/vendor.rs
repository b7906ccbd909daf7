//! Vendor verification client for third-party coupons

use std::time::Duration;

use failure::Error as FailureError;
use reqwest;

use config;

/// Verification of third-party coupons against an external vendor api.
/// Implementations must be fail-closed: any doubt counts as a rejection.
pub trait CouponVerifier: Send + Sync + 'static {
    /// Returns true only if the vendor confirmed the coupon
    fn verify(&self, code: &str) -> bool;
}

#[derive(Debug, Deserialize)]
struct VendorVerifyResponse {
    valid: bool,
}

/// Vendor api client with a bounded timeout, single attempt per coupon
pub struct VendorClient {
    client: reqwest::Client,
    api_url: String,
    verify_path: String,
}

impl VendorClient {
    pub fn new(config: &config::Vendor) -> Result<Self, FailureError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            verify_path: config.verify_path.clone(),
        })
    }

    fn verify_request(&self, code: &str) -> Result<bool, FailureError> {
        let url = format!("{}{}", self.api_url, self.verify_path);
        let mut response = self.client.get(&url).query(&[("couponCode", code)]).send()?;

        if !response.status().is_success() {
            debug!("Vendor api replied with status {} for coupon {}.", response.status(), code);
            return Ok(false);
        }

        let body: VendorVerifyResponse = response.json()?;
        Ok(body.valid)
    }
}

impl CouponVerifier for VendorClient {
    fn verify(&self, code: &str) -> bool {
        match self.verify_request(code) {
            Ok(valid) => {
                debug!("Vendor verification of coupon {}: {}.", code, valid);
                valid
            }
            Err(e) => {
                error!("Vendor verification of coupon {} failed: {}.", code, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    use super::*;
    use config;

    fn create_client(api_url: String) -> VendorClient {
        let vendor_config = config::Vendor {
            api_url,
            verify_path: "/api/verify".to_string(),
            timeout_ms: 1000,
        };
        VendorClient::new(&vendor_config).unwrap()
    }

    // Answers exactly one request with the canned http response
    fn spawn_vendor_stub(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{}", address)
    }

    #[test]
    fn test_verify_is_fail_closed_on_transport_error() {
        // Nothing listens here, the request fails fast
        let client = create_client("http://127.0.0.1:1".to_string());
        assert!(!client.verify("SAVE10"));
    }

    #[test]
    fn test_verify_is_fail_closed_on_error_status() {
        let api_url = spawn_vendor_stub("HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let client = create_client(api_url);
        assert!(!client.verify("SAVE10"));
    }

    #[test]
    fn test_verify_is_fail_closed_on_malformed_body() {
        let api_url =
            spawn_vendor_stub("HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot json!");
        let client = create_client(api_url);
        assert!(!client.verify("SAVE10"));
    }

    #[test]
    fn test_verify_rejects_on_valid_false() {
        let api_url = spawn_vendor_stub(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 15\r\nConnection: close\r\n\r\n{\"valid\":false}",
        );
        let client = create_client(api_url);
        assert!(!client.verify("THIRDPARTY25"));
    }

    #[test]
    fn test_verify_confirms_on_valid_true() {
        let api_url = spawn_vendor_stub(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 14\r\nConnection: close\r\n\r\n{\"valid\":true}",
        );
        let client = create_client(api_url);
        assert!(client.verify("THIRDPARTY25"));
    }
}
