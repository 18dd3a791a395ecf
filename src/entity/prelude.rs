//! 预导入模块，方便使用

pub use super::evaluation_events::{
    ActiveModel as EvaluationEventActiveModel, Entity as EvaluationEvents,
    Model as EvaluationEventModel,
};
pub use super::review_sessions::{
    ActiveModel as ReviewSessionActiveModel, Entity as ReviewSessions, Model as ReviewSessionModel,
};
pub use super::reviews::{ActiveModel as ReviewActiveModel, Entity as Reviews, Model as ReviewModel};
pub use super::students::{
    ActiveModel as StudentActiveModel, Entity as Students, Model as StudentModel,
};
pub use super::teams::{ActiveModel as TeamActiveModel, Entity as Teams, Model as TeamModel};
