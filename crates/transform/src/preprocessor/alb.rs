//! 로드밸런서 액세스 로그 전처리기
//!
//! 공백으로 구분된 위치 기반 필드(따옴표 문자열 보존)를 구조화 JSON으로
//! 변환합니다. `client:port` 류 필드는 `_ip`/`_port` 쌍으로 분해되고,
//! `request` 필드는 메서드/URL/프로토콜로 분해됩니다. 값이 없는 필드는
//! `-` 플레이스홀더를 유지합니다.

use serde_json::{Map, Value};

use ocsforge_core::error::{OcsforgeError, ParseError};
use ocsforge_core::pipeline::{DecodedInput, Preprocessor};

/// 액세스 로그의 위치 기반 필드 이름 (로그 한 줄의 토큰 순서)
const FIELDS: &[&str] = &[
    "type",
    "time",
    "elb",
    "client:port",
    "target:port",
    "request_processing_time",
    "target_processing_time",
    "response_processing_time",
    "elb_status_code",
    "target_status_code",
    "received_bytes",
    "sent_bytes",
    "request",
    "user_agent",
    "ssl_cipher",
    "ssl_protocol",
    "target_group_arn",
    "trace_id",
    "domain_name",
    "chosen_cert_arn",
    "matched_rule_priority",
    "request_creation_time",
    "actions_executed",
    "redirect_url",
    "error_reason",
    "target:port_list",
    "target_status_code_list",
    "classification",
    "classification_reason",
    "conn_trace_id",
];

/// 값 없음 플레이스홀더
const PLACEHOLDER: &str = "-";

/// 로드밸런서 액세스 로그 전처리기
pub struct AlbPreprocessor;

impl AlbPreprocessor {
    /// 로그 한 줄을 구조화 JSON으로 변환합니다.
    fn parse_line(line: &str) -> Map<String, Value> {
        let values = tokenize(line);
        let mut result = Map::new();

        for (i, field) in FIELDS.iter().enumerate() {
            let Some(token) = values.get(i) else {
                // 뒤쪽 필드가 없는 짧은 줄은 플레이스홀더로 채움
                result.insert((*field).to_owned(), Value::String(PLACEHOLDER.to_owned()));
                continue;
            };
            let value = token.trim_matches('"');

            match *field {
                "client:port" | "target:port" => {
                    let base = field.trim_end_matches(":port");
                    let (ip, port) = split_ip_port(value);
                    result.insert(format!("{base}_ip"), Value::String(ip));
                    result.insert(format!("{base}_port"), Value::String(port));
                }
                "target:port_list" => {
                    let (ips, ports) = split_ip_port_list(value);
                    result.insert("target_ip_list".to_owned(), Value::String(ips));
                    result.insert("target_port_list".to_owned(), Value::String(ports));
                }
                "request" => {
                    if value == PLACEHOLDER {
                        for key in ["request_method", "request_url", "request_protocol"] {
                            result.insert(key.to_owned(), Value::String(PLACEHOLDER.to_owned()));
                        }
                    } else {
                        let parts: Vec<&str> = value.split(' ').collect();
                        if parts.len() == 3 {
                            result.insert(
                                "request_method".to_owned(),
                                Value::String(parts[0].to_owned()),
                            );
                            result
                                .insert("request_url".to_owned(), Value::String(parts[1].to_owned()));
                            result.insert(
                                "request_protocol".to_owned(),
                                Value::String(parts[2].to_owned()),
                            );
                        } else {
                            // 기대한 형식이 아니면 원문 유지
                            result.insert("request".to_owned(), Value::String(value.to_owned()));
                        }
                    }
                }
                _ => {
                    result.insert((*field).to_owned(), Value::String(value.to_owned()));
                }
            }
        }

        result
    }
}

impl Preprocessor for AlbPreprocessor {
    fn name(&self) -> &str {
        "alb"
    }

    fn preprocess(&self, input: DecodedInput) -> Result<Value, OcsforgeError> {
        match input {
            DecodedInput::Raw(line) => Ok(Value::Object(Self::parse_line(&line))),
            DecodedInput::Json(_) => Err(OcsforgeError::Parse(ParseError::UnsupportedFormat(
                "alb preprocessor expects a raw log line".to_owned(),
            ))),
        }
    }
}

/// 공백 구분 토큰화. 따옴표 내부의 공백은 구분자로 취급하지 않습니다.
fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// `ip:port`를 분해합니다. 플레이스홀더나 포트 구분자가 없으면 둘 다 `-`.
fn split_ip_port(value: &str) -> (String, String) {
    if value == PLACEHOLDER {
        return (PLACEHOLDER.to_owned(), PLACEHOLDER.to_owned());
    }
    match value.rsplit_once(':') {
        Some((ip, port)) => (ip.to_owned(), port.to_owned()),
        None => (PLACEHOLDER.to_owned(), PLACEHOLDER.to_owned()),
    }
}

/// 공백 구분 `ip:port` 목록을 병렬 목록 쌍으로 분해합니다.
///
/// 항목 하나라도 형식이 어긋나면 전체를 플레이스홀더로 처리합니다.
fn split_ip_port_list(value: &str) -> (String, String) {
    if value == PLACEHOLDER {
        return (PLACEHOLDER.to_owned(), PLACEHOLDER.to_owned());
    }

    let mut ips = Vec::new();
    let mut ports = Vec::new();
    for entry in value.split(' ') {
        match entry.rsplit_once(':') {
            Some((ip, port)) => {
                ips.push(ip);
                ports.push(port);
            }
            None => return (PLACEHOLDER.to_owned(), PLACEHOLDER.to_owned()),
        }
    }

    (ips.join(" "), ports.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_LINE: &str = r#"https 2024-01-15T12:00:00.123456Z app/my-lb/50dc6c495c0c9188 192.168.131.39:2817 10.0.0.1:80 0.000 0.001 0.000 200 200 34 366 "GET https://www.example.com:443/ HTTP/1.1" "curl/7.46.0" ECDHE-RSA-AES128-GCM-SHA256 TLSv1.2 arn:aws:elasticloadbalancing:us-east-2:123456789012:targetgroup/my-targets/73e2d6bc24d8a067 "Root=1-58337281-1d84f3d73c47ec4e58577259" "www.example.com" "arn:aws:acm:us-east-2:123456789012:certificate/12345678-1234-1234-1234-123456789012" 0 2024-01-15T12:00:00.123000Z "forward" "-" "-" "10.0.0.1:80" "200" "-" "-" TID_1234"#;

    fn parse(line: &str) -> Map<String, Value> {
        AlbPreprocessor::parse_line(line)
    }

    #[test]
    fn parses_positional_fields() {
        let result = parse(SAMPLE_LINE);
        assert_eq!(result.get("type"), Some(&Value::String("https".to_owned())));
        assert_eq!(
            result.get("time"),
            Some(&Value::String("2024-01-15T12:00:00.123456Z".to_owned()))
        );
        assert_eq!(
            result.get("elb_status_code"),
            Some(&Value::String("200".to_owned()))
        );
    }

    #[test]
    fn splits_client_and_target_ports() {
        let result = parse(SAMPLE_LINE);
        assert_eq!(
            result.get("client_ip"),
            Some(&Value::String("192.168.131.39".to_owned()))
        );
        assert_eq!(result.get("client_port"), Some(&Value::String("2817".to_owned())));
        assert_eq!(result.get("target_ip"), Some(&Value::String("10.0.0.1".to_owned())));
        assert_eq!(result.get("target_port"), Some(&Value::String("80".to_owned())));
        // 원래 합쳐져 있던 필드는 남지 않음
        assert!(!result.contains_key("client:port"));
    }

    #[test]
    fn splits_request_into_parts() {
        let result = parse(SAMPLE_LINE);
        assert_eq!(
            result.get("request_method"),
            Some(&Value::String("GET".to_owned()))
        );
        assert_eq!(
            result.get("request_url"),
            Some(&Value::String("https://www.example.com:443/".to_owned()))
        );
        assert_eq!(
            result.get("request_protocol"),
            Some(&Value::String("HTTP/1.1".to_owned()))
        );
        assert!(!result.contains_key("request"));
    }

    #[test]
    fn quoted_user_agent_is_one_token() {
        let line = r#"https 2024-01-15T12:00:00Z my-lb 1.2.3.4:80 - 0 0 0 200 - 0 0 "GET http://x/ HTTP/1.1" "Mozilla/5.0 (Windows NT 10.0; Win64; x64)" - -"#;
        let result = parse(line);
        assert_eq!(
            result.get("user_agent"),
            Some(&Value::String(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_owned()
            ))
        );
    }

    #[test]
    fn placeholder_client_port() {
        let line = "https 2024-01-15T12:00:00Z my-lb - -";
        let result = parse(line);
        assert_eq!(result.get("client_ip"), Some(&Value::String("-".to_owned())));
        assert_eq!(result.get("client_port"), Some(&Value::String("-".to_owned())));
    }

    #[test]
    fn short_line_fills_placeholders() {
        let result = parse("https 2024-01-15T12:00:00Z");
        assert_eq!(result.get("elb"), Some(&Value::String("-".to_owned())));
        assert_eq!(
            result.get("conn_trace_id"),
            Some(&Value::String("-".to_owned()))
        );
    }

    #[test]
    fn target_port_list_split() {
        let (ips, ports) = split_ip_port_list("10.0.0.1:80 10.0.0.2:8080");
        assert_eq!(ips, "10.0.0.1 10.0.0.2");
        assert_eq!(ports, "80 8080");
    }

    #[test]
    fn target_port_list_malformed_entry() {
        let (ips, ports) = split_ip_port_list("10.0.0.1:80 bogus");
        assert_eq!(ips, "-");
        assert_eq!(ports, "-");
    }

    #[test]
    fn malformed_request_is_kept_verbatim() {
        // request 토큰이 3요소가 아닌 경우
        let line = r#"https 2024-01-15T12:00:00Z my-lb 1.2.3.4:80 - 0 0 0 200 - 0 0 "GET-only" "ua" - -"#;
        let result = parse(line);
        assert_eq!(
            result.get("request"),
            Some(&Value::String("GET-only".to_owned()))
        );
        assert!(!result.contains_key("request_method"));
    }

    #[test]
    fn preprocess_rejects_json_input() {
        let result = AlbPreprocessor.preprocess(DecodedInput::Json(serde_json::json!({})));
        assert!(result.is_err());
    }

    #[test]
    fn preprocess_raw_line_yields_object() {
        let value = AlbPreprocessor
            .preprocess(DecodedInput::Raw(SAMPLE_LINE.to_owned()))
            .unwrap();
        assert!(value.is_object());
        assert_eq!(value.get("type"), Some(&Value::String("https".to_owned())));
    }
}
