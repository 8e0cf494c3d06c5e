//! 매핑 인터프리터 -- 매핑 트리를 따라 변환 레코드를 생성합니다.
//!
//! [`transform`]은 매핑 명세 트리를 재귀적으로 걸으며 출력 레코드를
//! 만듭니다. 필드 하나의 실패가 레코드 전체를 중단시키지 않습니다:
//! 실패한 필드는 null로 채워지고 [`FieldDiagnostic`]으로 기록되며,
//! 나머지 필드는 계속 처리됩니다. 이 부분 실패 계약은 명시적 반환
//! 값으로 표현되어 테스트 가능합니다.

use std::fmt;

use serde_json::{Map, Value};

use ocsforge_core::types::UserDefinedValues;

use super::types::{EnumOperand, MappingNode};

/// 필드 단위 진단
///
/// 레코드 생성은 계속되었지만 해당 필드가 정상 해소되지 않았음을
/// 나타냅니다.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDiagnostic {
    /// 대상 필드의 점 표기 경로 (예: "actor.process.name")
    pub field: String,
    /// 진단 종류
    pub kind: DiagnosticKind,
}

/// 진단 종류
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    /// 로케이터 경로가 이벤트에서 해소되지 않음 (필드는 null)
    FieldNotFound {
        /// 해소에 실패한 로케이터
        locator: String,
    },
    /// enum 피연산자가 로케이터가 아니어서 할당이 생략됨.
    ///
    /// 업스트림에서 물려받은 동작으로, 리터럴 비교로의 폴백 여부는
    /// 확정되지 않았습니다. 할당 생략을 유지하되 진단으로 노출합니다.
    EnumOperandNotLocator,
    /// 필드 처리 중 에러 발생 (필드는 null)
    FieldError {
        /// 에러 내용
        reason: String,
    },
}

impl fmt::Display for FieldDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::FieldNotFound { locator } => {
                write!(f, "{}: locator {} not found in event", self.field, locator)
            }
            DiagnosticKind::EnumOperandNotLocator => {
                write!(f, "{}: enum evaluate is not a locator, skipped", self.field)
            }
            DiagnosticKind::FieldError { reason } => {
                write!(f, "{}: {}", self.field, reason)
            }
        }
    }
}

/// 변환 결과
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutput {
    /// 변환된 레코드 (매핑 명세의 모든 키 포함, 문서화된 enum 에지
    /// 케이스 제외)
    pub record: Map<String, Value>,
    /// 필드 단위 진단 목록
    pub diagnostics: Vec<FieldDiagnostic>,
}

impl TransformOutput {
    /// 진단 없이 완전히 해소되었는지 확인합니다.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// 매핑 명세를 이벤트에 적용하여 변환 레코드를 생성합니다.
///
/// 루트는 Object 노드여야 합니다 (문서 로드 시 검증됨).
pub fn transform(
    mapping: &MappingNode,
    event: &Value,
    user_defined: &UserDefinedValues,
) -> TransformOutput {
    let mut diagnostics = Vec::new();
    let record = match mapping {
        MappingNode::Object(children) => {
            walk(children, event, user_defined, "", &mut diagnostics)
        }
        _ => Map::new(),
    };
    TransformOutput {
        record,
        diagnostics,
    }
}

fn walk(
    children: &[(String, MappingNode)],
    event: &Value,
    user_defined: &UserDefinedValues,
    prefix: &str,
    diagnostics: &mut Vec<FieldDiagnostic>,
) -> Map<String, Value> {
    let mut record = Map::new();

    for (key, node) in children {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match node {
            MappingNode::Object(nested) => {
                let sub = walk(nested, event, user_defined, &path, diagnostics);
                record.insert(key.clone(), Value::Object(sub));
            }
            MappingNode::Literal(value) => {
                record.insert(key.clone(), value.clone());
            }
            MappingNode::Locator(locator) => match locator.locate(event, user_defined) {
                Ok(Some(value)) => {
                    record.insert(key.clone(), Value::String(value));
                }
                Ok(None) => {
                    record.insert(key.clone(), Value::Null);
                    diagnostics.push(FieldDiagnostic {
                        field: path,
                        kind: DiagnosticKind::FieldNotFound {
                            locator: locator.to_string(),
                        },
                    });
                }
                Err(e) => {
                    record.insert(key.clone(), Value::Null);
                    diagnostics.push(FieldDiagnostic {
                        field: path,
                        kind: DiagnosticKind::FieldError {
                            reason: e.to_string(),
                        },
                    });
                }
            },
            MappingNode::Enum(spec) => match &spec.evaluate {
                EnumOperand::Locator(locator) => match locator.locate(event, user_defined) {
                    Ok(resolved) => {
                        // 해소 실패(None)는 어떤 키와도 일치하지 않으므로
                        // 기본값으로 귀결됩니다.
                        let output = resolved
                            .and_then(|v| spec.values.get(&v))
                            .cloned()
                            .unwrap_or_else(|| spec.other.clone());
                        record.insert(key.clone(), output);
                    }
                    Err(e) => {
                        record.insert(key.clone(), Value::Null);
                        diagnostics.push(FieldDiagnostic {
                            field: path,
                            kind: DiagnosticKind::FieldError {
                                reason: e.to_string(),
                            },
                        });
                    }
                },
                EnumOperand::Literal(_) => {
                    // 할당 생략 (문서화된 에지 케이스)
                    diagnostics.push(FieldDiagnostic {
                        field: path,
                        kind: DiagnosticKind::EnumOperandNotLocator,
                    });
                }
            },
        }
    }

    record
}
