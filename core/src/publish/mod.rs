mod envelope;
mod flow;
pub mod models;
mod prompt;
pub mod r#trait;

pub use envelope::{build_envelope, decode_opaque, encode_opaque, TransportEnvelope};
pub use flow::{publish, PublishRequest};
pub use models::{
    CheckExistsPayload, EncodedFile, Existence, PublishOutcome, SubmitPayload, CLIENT_TYPE,
};
pub use prompt::{choose_profile, confirm_overwrite};
pub use r#trait::{DeploymentApi, Prompter};
