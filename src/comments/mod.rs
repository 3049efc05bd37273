//! Reader comments: the submission form and its delivery

mod form;
mod submit;

pub use form::{validate, CommentInput, FieldError, FormState};
pub use submit::{
    new_comment_document, CommentSubmitter, HttpCommentSubmitter, SubmitError, COMMENT_ENDPOINT,
};
