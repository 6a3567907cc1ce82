use async_graphql::Error;

use psychonaut_client::PsychonautError;

pub fn upstream(err: PsychonautError) -> Error {
    Error::new(err.to_string())
}
