use cogex_core::{Key, ParticipantId, Stimulus, Trial};
use rand::Rng;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Response type of a task's stimulus.
pub type ResponseOf<K> = <<K as Task>::Stimulus as Stimulus>::Response;

/// Flat, serde-friendly row written to both the JSON and the CSV file.
pub trait TabularRecord: Serialize + DeserializeOwned {
    /// Column names in field declaration order. Written even when there are
    /// no rows, so an empty session still yields a valid CSV.
    const HEADERS: &'static [&'static str];
}

/// Trial generation and key mapping for one experiment
pub trait Task {
    type Stimulus: Stimulus;
    type Record: TabularRecord;

    fn next_trial<R: Rng>(&mut self, rng: &mut R, index: usize) -> Trial<Self::Stimulus>;

    /// Maps a key to a response, `None` for keys the task does not accept.
    fn interpret_key(&self, key: Key) -> Option<ResponseOf<Self>>;

    fn instructions(&self) -> Vec<String>;

    fn record(&self, participant: &ParticipantId, trial: &Trial<Self::Stimulus>) -> Self::Record;
}
