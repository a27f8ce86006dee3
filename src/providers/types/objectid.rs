use uuid::Uuid;

/// Prefixed, globally unique identifier such as `msg_3f2a...` or `call_9b1c...`.
pub fn create_object_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}
