pub mod answer;
pub mod game;
pub mod results;
pub mod session;
pub mod status;

pub use answer::{AnswerRecord, QuestionOutcome, RevealResponse, SubmitAnswerRequest};
pub use game::{AnswerOption, Game, Question, QuestionKind, Selection};
pub use results::{PlayerAnswers, PlayerScore, QuestionStats, SessionResults};
pub use session::{AdvanceOutcome, JoinSessionRequest, Player};
pub use status::{AdminStatus, Phase, QuestionView, StatusSnapshot};
