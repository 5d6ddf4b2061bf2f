pub const RECORDS: &str = "consumption_records";
pub const RECORD_IDS: &str = "consumption_record_ids";
pub const META: &str = "meta";
