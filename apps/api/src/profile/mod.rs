// User profiles: interests, skills and course progress.
// Identity fields are written only by the identity webhooks.

pub mod handlers;
pub mod interests;
pub mod queries;
