/// Stand-in for `chrono::Utc` with `now` pinned to a fixed instant,
/// so backends that stamp records produce stable values under test.
pub struct Utc;

impl Utc {
    pub fn now() -> ::chrono::DateTime<::chrono::Utc> {
        ::chrono::DateTime::from_timestamp(1_234_567_890, 0)
            .expect("a valid timestamp")
    }
}
