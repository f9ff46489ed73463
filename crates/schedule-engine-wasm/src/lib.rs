//! WASM bindings for schedule-engine.
//!
//! Exposes conflict checking, the active-on filter, the day agenda and the
//! upcoming list to the JavaScript client via `wasm-bindgen`. Records cross the
//! boundary as JSON strings in the client's document shape (`startDateTime`,
//! `repeatDays`, ...).
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p schedule-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target bundler --out-dir packages/schedule-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/schedule_engine_wasm.wasm
//! ```

use schedule_engine::{parse_calendar_date, parse_instant};
use schedule_engine::{CandidateInterval, RepeatDays, ScheduleRecord};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

/// Record as stored by the client. Timestamps are ISO 8601 strings.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordInput {
    #[serde(default)]
    id: String,
    #[serde(default, alias = "userId")]
    owner_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    location: String,
    start_date_time: String,
    end_date_time: String,
    #[serde(default)]
    repeat_days: Vec<u8>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidateInput {
    start_date_time: String,
    end_date_time: String,
    #[serde(default)]
    repeat_days: Vec<u8>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConflictDto {
    id: String,
    title: String,
    overlap_minutes: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpcomingDto {
    record: ScheduleRecord,
    start: String,
    end: String,
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn repeat_days(indices: Vec<u8>) -> Result<RepeatDays, JsValue> {
    RepeatDays::from_indices(indices).map_err(to_js)
}

/// Convert a JSON array of client records into `Vec<ScheduleRecord>`.
fn parse_records_json(json: &str) -> Result<Vec<ScheduleRecord>, JsValue> {
    let inputs: Vec<RecordInput> = serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid records JSON: {}", e)))?;

    inputs
        .into_iter()
        .map(|input| {
            Ok(ScheduleRecord {
                id: input.id,
                owner_id: input.owner_id,
                title: input.title,
                description: input.description,
                location: input.location,
                start_date_time: parse_instant(&input.start_date_time).map_err(to_js)?,
                end_date_time: parse_instant(&input.end_date_time).map_err(to_js)?,
                repeat_days: repeat_days(input.repeat_days)?,
            })
        })
        .collect()
}

fn parse_candidate_json(json: &str) -> Result<CandidateInterval, JsValue> {
    let input: CandidateInput = serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid candidate JSON: {}", e)))?;

    Ok(CandidateInterval::new(
        parse_instant(&input.start_date_time).map_err(to_js)?,
        parse_instant(&input.end_date_time).map_err(to_js)?,
        repeat_days(input.repeat_days)?,
    ))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Whether a candidate `{startDateTime, endDateTime, repeatDays}` clashes with
/// any of the owner's existing records (a JSON array).
#[wasm_bindgen(js_name = "hasConflict")]
pub fn has_conflict(candidate_json: &str, existing_json: &str) -> Result<bool, JsValue> {
    let candidate = parse_candidate_json(candidate_json)?;
    let existing = parse_records_json(existing_json)?;

    Ok(schedule_engine::has_conflict(&candidate, &existing))
}

/// Every clashing record as a JSON array of `{id, title, overlapMinutes}`.
#[wasm_bindgen(js_name = "findConflicts")]
pub fn find_conflicts(candidate_json: &str, existing_json: &str) -> Result<String, JsValue> {
    let candidate = parse_candidate_json(candidate_json)?;
    let existing = parse_records_json(existing_json)?;

    let dtos: Vec<ConflictDto> = schedule_engine::find_conflicts(&candidate, &existing)
        .iter()
        .map(|c| ConflictDto {
            id: c.existing.id.clone(),
            title: c.existing.title.clone(),
            overlap_minutes: c.overlap_minutes,
        })
        .collect();

    to_json(&dtos)
}

/// Records active on `date` (`YYYY-MM-DD`, UTC), in input order.
#[wasm_bindgen(js_name = "activeOn")]
pub fn active_on(date: &str, records_json: &str) -> Result<String, JsValue> {
    let date = parse_calendar_date(date).map_err(to_js)?;
    let records = parse_records_json(records_json)?;

    to_json(&schedule_engine::active_on(date, &records))
}

/// The day view: records active on `date`, sorted by start time.
#[wasm_bindgen(js_name = "agenda")]
pub fn agenda(date: &str, records_json: &str) -> Result<String, JsValue> {
    let date = parse_calendar_date(date).map_err(to_js)?;
    let records = parse_records_json(records_json)?;

    to_json(&schedule_engine::agenda_for(date, &records))
}

/// Records with a slot ending after `now`, soonest first, as
/// `{record, start, end}` objects.
#[wasm_bindgen(js_name = "upcoming")]
pub fn upcoming(now: &str, records_json: &str, limit: Option<u32>) -> Result<String, JsValue> {
    let now = parse_instant(now).map_err(to_js)?;
    let records = parse_records_json(records_json)?;

    let events =
        schedule_engine::upcoming(now, &records, limit.map(|l| l as usize)).map_err(to_js)?;
    let dtos: Vec<UpcomingDto> = events
        .into_iter()
        .map(|e| UpcomingDto {
            record: e.record,
            start: e.start.to_rfc3339(),
            end: e.end.to_rfc3339(),
        })
        .collect();

    to_json(&dtos)
}
