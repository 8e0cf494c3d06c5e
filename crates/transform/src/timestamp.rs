//! 타임스탬프 정규화 -- 파티션 키(`YYYYMMDD`) 계산
//!
//! 소스별 타임스탬프 표현(에포크 초 또는 strftime 패턴)을 일 단위
//! 파티션 키로 변환합니다. 에포크 변환은 프로세스 로컬 타임존을
//! 사용합니다. 파티션 날짜가 실행 환경에 의존하게 되는 이식성
//! 제약이 있으며, 고정 타임존으로의 변경은 미확정입니다.

use chrono::{Datelike, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone};

use crate::error::TransformError;

/// 에포크 초 형식을 나타내는 예약 형식 문자열
pub const EPOCH_FORMAT: &str = "epoch";

/// 타임스탬프 문자열을 일 단위 파티션 키로 변환합니다.
///
/// - `format == "epoch"`: 에포크 초 정수로 해석하여 로컬 달력 날짜로 변환
/// - 그 외: `format`을 strftime 패턴으로 사용하여 파싱 (시간 없는
///   날짜 전용 패턴도 허용)
///
/// 파싱 실패는 해당 이벤트의 하드 에러이며, 호출자는 이벤트를 언매핑
/// 처리합니다.
pub fn event_day(value: &str, format: &str) -> Result<String, TransformError> {
    if format == EPOCH_FORMAT {
        let secs = value.trim().parse::<i64>().map_err(|e| TransformError::Timestamp {
            value: value.to_owned(),
            format: format.to_owned(),
            reason: format!("not an integer epoch: {e}"),
        })?;

        let datetime = match Local.timestamp_opt(secs, 0) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
            LocalResult::None => {
                return Err(TransformError::Timestamp {
                    value: value.to_owned(),
                    format: format.to_owned(),
                    reason: "epoch out of range".to_owned(),
                });
            }
        };

        return Ok(format_day(
            datetime.year(),
            datetime.month(),
            datetime.day(),
        ));
    }

    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
        return Ok(format_day(datetime.year(), datetime.month(), datetime.day()));
    }

    // 시간 요소가 없는 날짜 전용 패턴
    match NaiveDate::parse_from_str(value, format) {
        Ok(date) => Ok(format_day(date.year(), date.month(), date.day())),
        Err(e) => Err(TransformError::Timestamp {
            value: value.to_owned(),
            format: format.to_owned(),
            reason: e.to_string(),
        }),
    }
}

fn format_day(year: i32, month: u32, day: u32) -> String {
    format!("{year:04}{month:02}{day:02}")
}
