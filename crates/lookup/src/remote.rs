//! Remote registry client.
//!
//! Speaks a small JSON protocol: `GET {endpoint}/codes/{permit_id}`
//! returns `{"results": [{"registry_id": "...", "codes": ["4941", ...]}]}`.
//! Results concatenate in response order, duplicates preserved, matching
//! the local registry semantics. An empty result list is `NO_MATCH`.

use std::thread;
use std::time::Duration;

use permitscreen_engine::model::CodeSet;

use crate::error::LookupError;
use crate::registry::{is_well_formed, normalize};
use crate::CodeSource;

const MAX_RETRIES: u32 = 3;
const USER_AGENT: &str = concat!("pscreen/", env!("CARGO_PKG_VERSION"));

pub struct RemoteRegistry {
    http: reqwest::blocking::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RemoteRegistry {
    pub fn new(endpoint: &str, api_key: Option<String>) -> Result<Self, LookupError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LookupError::Transport(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// GET with retry + exponential backoff. Auth and other 4xx fail
    /// immediately; 429 and 5xx retry with 1s/2s/4s backoff, honoring
    /// `Retry-After` on 429.
    fn get_with_retry(&self, url: &str) -> Result<serde_json::Value, LookupError> {
        let mut backoff_secs = 1u64;

        for attempt in 0..=MAX_RETRIES {
            let mut req = self.http.get(url);
            if let Some(key) = &self.api_key {
                req = req.bearer_auth(key);
            }

            match req.send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();

                    if status == 401 || status == 403 {
                        return Err(LookupError::Auth {
                            status,
                            message: body_message(resp),
                        });
                    }

                    if (400..500).contains(&status) && status != 429 {
                        return Err(LookupError::Upstream {
                            status,
                            message: body_message(resp),
                        });
                    }

                    if status == 429 || status >= 500 {
                        if attempt == MAX_RETRIES {
                            if status == 429 {
                                return Err(LookupError::RateLimited {
                                    attempts: MAX_RETRIES,
                                });
                            }
                            return Err(LookupError::Upstream {
                                status,
                                message: format!("after {MAX_RETRIES} attempts"),
                            });
                        }

                        let wait = if status == 429 {
                            resp.headers()
                                .get("retry-after")
                                .and_then(|v| v.to_str().ok())
                                .and_then(|v| v.parse::<u64>().ok())
                                .unwrap_or(backoff_secs)
                        } else {
                            backoff_secs
                        };

                        eprintln!(
                            "warning: registry retry {}/{} in {}s (HTTP {})",
                            attempt + 1,
                            MAX_RETRIES,
                            wait,
                            status,
                        );
                        thread::sleep(Duration::from_secs(wait));
                        backoff_secs *= 2;
                        continue;
                    }

                    let text = resp
                        .text()
                        .map_err(|e| LookupError::Transport(format!("reading body: {e}")))?;
                    let trimmed = text.trim_start_matches('\u{feff}');
                    return serde_json::from_str(trimmed).map_err(|e| {
                        LookupError::Parse(format!(
                            "{} (body: {})",
                            e,
                            &trimmed[..trimmed.len().min(200)],
                        ))
                    });
                }
                Err(e) => {
                    if attempt == MAX_RETRIES {
                        return Err(LookupError::Transport(format!(
                            "after {MAX_RETRIES} attempts: {e}"
                        )));
                    }
                    eprintln!(
                        "warning: registry retry {}/{} in {}s ({})",
                        attempt + 1,
                        MAX_RETRIES,
                        backoff_secs,
                        e,
                    );
                    thread::sleep(Duration::from_secs(backoff_secs));
                    backoff_secs *= 2;
                }
            }
        }

        unreachable!()
    }
}

fn body_message(resp: reqwest::blocking::Response) -> String {
    let body: serde_json::Value = resp.json().unwrap_or(serde_json::Value::Null);
    body.get("error")
        .and_then(|e| e.as_str())
        .unwrap_or("no error detail")
        .to_string()
}

impl CodeSource for RemoteRegistry {
    fn lookup(&self, permit_id: &str) -> Result<CodeSet, LookupError> {
        let query = normalize(permit_id);
        if !is_well_formed(&query) {
            return Ok(CodeSet::NoMatch);
        }

        let url = format!("{}/codes/{}", self.endpoint, query);
        let body = self.get_with_retry(&url)?;

        let results = body
            .get("results")
            .and_then(|r| r.as_array())
            .ok_or_else(|| LookupError::Parse("missing \"results\" array".to_string()))?;

        let mut codes = Vec::new();
        for entry in results {
            let entry_codes = entry
                .get("codes")
                .and_then(|c| c.as_array())
                .ok_or_else(|| LookupError::Parse("result without \"codes\" array".to_string()))?;
            for code in entry_codes {
                let code = code
                    .as_str()
                    .ok_or_else(|| LookupError::Parse("non-string code".to_string()))?;
                codes.push(code.to_string());
            }
        }

        if codes.is_empty() {
            Ok(CodeSet::NoMatch)
        } else {
            Ok(CodeSet::Codes(codes))
        }
    }
}
