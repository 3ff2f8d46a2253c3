/// Error type crossing the domain trait seams.
///
/// `Send + Sync` so failures can leave the blocking worker that runs a job.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
