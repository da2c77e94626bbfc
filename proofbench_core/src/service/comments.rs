use std::sync::Arc;

use thiserror::Error;

use crate::{
    entity::prelude::*,
    error::StoreError,
    identity::IdentityProvider,
    ids::{CommentId, UserId, VideoId},
    store::{CommentRepository, CommentWithAuthor},
    thread::{build_comment_tree, can_modify, CommentNode},
};

#[derive(Debug, Error)]
pub enum CommentsServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("not signed in")]
    Unauthenticated,

    #[error("comment not found")]
    CommentNotFound,

    #[error("unauthorized: not comment author")]
    Unauthorized,

    #[error("parent comment belongs to another video")]
    ParentOnOtherVideo,

    #[error("replies may only nest {max_depth} level(s) deep")]
    NestingTooDeep { max_depth: usize },

    #[error("comment is empty")]
    EmptyContent,
}

#[derive(Clone)]
pub struct CommentsService {
    comments: Arc<dyn CommentRepository>,
    identity: Arc<dyn IdentityProvider>,
    max_depth: usize,
}

impl CommentsService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        identity: Arc<dyn IdentityProvider>,
        max_depth: usize,
    ) -> Self {
        Self {
            comments,
            identity,
            max_depth,
        }
    }

    /// All comments of a video as a reply tree, oldest first.
    pub async fn list_thread(
        &self,
        video_id: VideoId,
    ) -> Result<Vec<CommentNode<CommentWithAuthor>>, CommentsServiceError> {
        let comments = self.comments.list_comments(video_id).await?;
        Ok(build_comment_tree(comments, self.max_depth))
    }

    /// Posts a root comment, or a reply when `parent_id` is given.
    pub async fn create_comment(
        &self,
        video_id: VideoId,
        content: &str,
        parent_id: Option<CommentId>,
    ) -> Result<VideoCommentModel, CommentsServiceError> {
        let user_id = self.current_user().await?;

        let content = content.trim();
        if content.is_empty() {
            return Err(CommentsServiceError::EmptyContent);
        }

        if let Some(parent_id) = parent_id {
            let parent = self.get_comment(parent_id).await?;
            if parent.video_id != video_id {
                return Err(CommentsServiceError::ParentOnOtherVideo);
            }

            // Depth of the new reply below its root
            let depth = self.depth_of(parent).await? + 1;
            if depth > self.max_depth {
                return Err(CommentsServiceError::NestingTooDeep {
                    max_depth: self.max_depth,
                });
            }
        }

        let comment = self
            .comments
            .insert_comment(video_id, user_id, parent_id, content.to_owned())
            .await?;

        tracing::debug!(comment_id = %comment.id, %video_id, "comment posted");
        Ok(comment)
    }

    /// Edits a comment (only by author)
    pub async fn update_comment(
        &self,
        comment_id: CommentId,
        content: &str,
    ) -> Result<VideoCommentModel, CommentsServiceError> {
        let user_id = self.current_user().await?;
        let comment = self.get_comment(comment_id).await?;

        if !can_modify(&comment, Some(user_id)) {
            return Err(CommentsServiceError::Unauthorized);
        }

        let content = content.trim();
        if content.is_empty() {
            return Err(CommentsServiceError::EmptyContent);
        }

        self.comments
            .update_comment(comment_id, content.to_owned())
            .await?
            .ok_or(CommentsServiceError::CommentNotFound)
    }

    /// Deletes a comment and its replies (only by author)
    pub async fn delete_comment(&self, comment_id: CommentId) -> Result<(), CommentsServiceError> {
        let user_id = self.current_user().await?;
        let comment = self.get_comment(comment_id).await?;

        if !can_modify(&comment, Some(user_id)) {
            return Err(CommentsServiceError::Unauthorized);
        }

        if !self.comments.delete_comment(comment_id).await? {
            return Err(CommentsServiceError::CommentNotFound);
        }

        tracing::debug!(%comment_id, "comment deleted");
        Ok(())
    }

    async fn current_user(&self) -> Result<UserId, CommentsServiceError> {
        self.identity
            .current_user_id()
            .await
            .ok_or(CommentsServiceError::Unauthenticated)
    }

    async fn get_comment(
        &self,
        comment_id: CommentId,
    ) -> Result<VideoCommentModel, CommentsServiceError> {
        self.comments
            .find_comment(comment_id)
            .await?
            .ok_or(CommentsServiceError::CommentNotFound)
    }

    /// Levels between `comment` and its root. Stops early once past `max_depth`.
    async fn depth_of(&self, comment: VideoCommentModel) -> Result<usize, CommentsServiceError> {
        let mut depth = 0;
        let mut current = comment;

        while let Some(parent_id) = current.parent_id {
            depth += 1;
            if depth > self.max_depth {
                break;
            }
            current = self.get_comment(parent_id).await?;
        }

        Ok(depth)
    }
}
