#[cfg(test)]
mod entity_tests {
    use crate::entity::prelude::*;
    use crate::ids::*;
    use crate::models::migrator::Migrator;
    use chrono::Utc;
    use sea_orm_migration::MigratorTrait;

    /// Test helper to create and migrate an in-memory database
    async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        // Run all migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    async fn insert_profile(db: &DatabaseConnection, email: &str, role: Role) -> UserId {
        let now = Utc::now();
        let profile_id = UserId::new();
        let profile = ProfileActiveModel {
            id: Set(profile_id),
            email: Set(email.to_string()),
            full_name: Set(None),
            avatar_url: Set(None),
            role: Set(role),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Profile::insert(profile).exec(db).await.unwrap();
        profile_id
    }

    /// profile -> course -> section -> video
    async fn insert_video_chain(db: &DatabaseConnection) -> (UserId, CourseId, SectionId, VideoId) {
        let now = Utc::now();
        let owner = insert_profile(db, "owner@example.com", Role::Admin).await;

        let course_id = CourseId::new();
        let course = CourseActiveModel {
            id: Set(course_id),
            title: Set("Chain".to_string()),
            description: Set(None),
            category: Set(CourseCategory::Business),
            thumbnail_url: Set(None),
            tags: Set(Tags(vec!["a".to_string(), "b".to_string()])),
            published: Set(false),
            created_by: Set(owner),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Course::insert(course).exec(db).await.unwrap();

        let section_id = SectionId::new();
        let section = SectionActiveModel {
            id: Set(section_id),
            course_id: Set(course_id),
            name: Set("Section".to_string()),
            order_index: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Section::insert(section).exec(db).await.unwrap();

        let video_id = VideoId::new();
        let video = VideoActiveModel {
            id: Set(video_id),
            section_id: Set(section_id),
            title: Set("Video".to_string()),
            description: Set(None),
            video_url: Set("https://vimeo.com/123456".to_string()),
            duration: Set(None),
            order_index: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Video::insert(video).exec(db).await.unwrap();

        (owner, course_id, section_id, video_id)
    }

    fn progress_row(user_id: UserId, video_id: VideoId) -> VideoProgressActiveModel {
        let now = Utc::now();
        VideoProgressActiveModel {
            id: Set(ProgressId::new()),
            user_id: Set(user_id),
            video_id: Set(video_id),
            last_position: Set(0),
            watch_percentage: Set(0),
            completed: Set(false),
            last_watched_at: Set(now),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    fn comment_row(
        video_id: VideoId,
        user_id: UserId,
        parent_id: Option<CommentId>,
    ) -> VideoCommentActiveModel {
        let now = Utc::now();
        VideoCommentActiveModel {
            id: Set(CommentId::new()),
            video_id: Set(video_id),
            user_id: Set(user_id),
            parent_id: Set(parent_id),
            content: Set("Nice".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_profile() {
        let db = setup_test_db().await;
        let profile_id = insert_profile(&db, "test@example.com", Role::SuperAdmin).await;

        let found = Profile::find_by_id(profile_id)
            .one(&db)
            .await
            .expect("Failed to query profile");

        assert!(found.is_some());
        let found_profile = found.unwrap();
        assert_eq!(found_profile.email, "test@example.com");
        assert_eq!(found_profile.role, Role::SuperAdmin);
    }

    #[tokio::test]
    async fn test_filter_profiles_by_role() {
        let db = setup_test_db().await;

        insert_profile(&db, "a@example.com", Role::Student).await;
        insert_profile(&db, "b@example.com", Role::Admin).await;
        insert_profile(&db, "c@example.com", Role::Student).await;

        let students = Profile::find()
            .filter(ProfileColumn::Role.eq(Role::Student))
            .all(&db)
            .await
            .unwrap();

        assert_eq!(students.len(), 2);
    }

    #[tokio::test]
    async fn test_profile_email_unique_constraint() {
        let db = setup_test_db().await;
        insert_profile(&db, "same@example.com", Role::Student).await;

        let now = Utc::now();
        let duplicate = ProfileActiveModel {
            id: Set(UserId::new()),
            email: Set("same@example.com".to_string()),
            full_name: Set(None),
            avatar_url: Set(None),
            role: Set(Role::Student),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = Profile::insert(duplicate).exec(&db).await;
        assert!(result.is_err(), "Should fail due to unique email");
    }

    #[tokio::test]
    async fn test_course_tags_round_trip_as_json() {
        let db = setup_test_db().await;
        let (_, course_id, _, _) = insert_video_chain(&db).await;

        let course = Course::find_by_id(course_id).one(&db).await.unwrap().unwrap();
        assert_eq!(course.tags, Tags(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(course.category, CourseCategory::Business);
    }

    #[tokio::test]
    async fn test_resource_kind_stored() {
        let db = setup_test_db().await;
        let (_, _, _, video_id) = insert_video_chain(&db).await;

        let resource = VideoResourceActiveModel {
            id: Set(ResourceId::new()),
            video_id: Set(video_id),
            title: Set("Repo".to_string()),
            url: Set("https://github.com/example/repo".to_string()),
            kind: Set(ResourceKind::Code),
            created_at: Set(Utc::now()),
        };
        VideoResource::insert(resource).exec(&db).await.unwrap();

        let code = VideoResource::find()
            .filter(VideoResourceColumn::Kind.eq(ResourceKind::Code))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(code.len(), 1);
        assert_eq!(code[0].title, "Repo");
    }

    #[tokio::test]
    async fn test_progress_unique_per_user_and_video() {
        let db = setup_test_db().await;
        let (owner, _, _, video_id) = insert_video_chain(&db).await;

        VideoProgress::insert(progress_row(owner, video_id))
            .exec(&db)
            .await
            .unwrap();

        // This should fail due to unique constraint on (user_id, video_id)
        let result = VideoProgress::insert(progress_row(owner, video_id))
            .exec(&db)
            .await;
        assert!(result.is_err(), "Should fail due to unique constraint");
    }

    #[tokio::test]
    async fn test_cascade_delete_section() {
        let db = setup_test_db().await;
        let (owner, _, section_id, video_id) = insert_video_chain(&db).await;

        VideoProgress::insert(progress_row(owner, video_id))
            .exec(&db)
            .await
            .unwrap();

        Section::delete_by_id(section_id).exec(&db).await.unwrap();

        let videos = Video::find()
            .filter(VideoColumn::SectionId.eq(section_id))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(videos.len(), 0, "Videos should be cascade deleted");

        let progress = VideoProgress::find()
            .filter(VideoProgressColumn::VideoId.eq(video_id))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(progress.len(), 0, "Progress should be cascade deleted");
    }

    #[tokio::test]
    async fn test_root_comment_has_no_parent() {
        let db = setup_test_db().await;
        let (owner, _, _, video_id) = insert_video_chain(&db).await;

        let root = comment_row(video_id, owner, None).insert(&db).await.unwrap();
        assert_eq!(root.parent_id, None);

        let found = VideoComment::find_by_id(root.id).one(&db).await.unwrap().unwrap();
        assert_eq!(found.parent_id, None);

        let reply = comment_row(video_id, owner, Some(root.id)).insert(&db).await.unwrap();
        let roots = VideoComment::find()
            .filter(VideoCommentColumn::ParentId.is_null())
            .all(&db)
            .await
            .unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].id, root.id);

        let found = VideoComment::find_by_id(reply.id).one(&db).await.unwrap().unwrap();
        assert_eq!(found.parent_id, Some(root.id));
    }

    #[tokio::test]
    async fn test_cascade_delete_comment_deletes_replies() {
        let db = setup_test_db().await;
        let (owner, _, _, video_id) = insert_video_chain(&db).await;

        let root = comment_row(video_id, owner, None).insert(&db).await.unwrap();
        for _ in 0..2 {
            VideoComment::insert(comment_row(video_id, owner, Some(root.id)))
                .exec(&db)
                .await
                .unwrap();
        }

        VideoComment::delete_by_id(root.id).exec(&db).await.unwrap();

        let remaining = VideoComment::find()
            .filter(VideoCommentColumn::VideoId.eq(video_id))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(remaining.len(), 0, "Replies should be cascade deleted");
    }

    #[tokio::test]
    async fn test_comment_author_join() {
        let db = setup_test_db().await;
        let (owner, _, _, video_id) = insert_video_chain(&db).await;

        VideoComment::insert(comment_row(video_id, owner, None))
            .exec(&db)
            .await
            .unwrap();

        let rows = VideoComment::find()
            .filter(VideoCommentColumn::VideoId.eq(video_id))
            .find_also_related(Profile)
            .all(&db)
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        let (_, author) = &rows[0];
        assert_eq!(author.as_ref().map(|profile| profile.id), Some(owner));
    }
}
