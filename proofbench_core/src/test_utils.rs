//! Fixtures shared by the store and service tests.

use std::sync::Arc;

use sea_orm_migration::MigratorTrait;

use crate::{
    entity::prelude::*,
    identity::LocalIdentity,
    ids::{CourseId, SectionId, UserId},
    models::migrator::Migrator,
    store::{
        CourseRepository, DatabaseStore, NewCourse, NewProfile, NewVideo, ProfileRepository,
    },
};

/// Fresh in-memory database with every migration applied.
pub async fn setup_store() -> Arc<DatabaseStore> {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    Arc::new(DatabaseStore::new(db))
}

/// Inserts a profile with `role` and returns it.
pub async fn seed_profile(store: &DatabaseStore, email: &str, role: Role) -> ProfileModel {
    let profile = store
        .insert_profile(NewProfile {
            id: UserId::new(),
            email: email.to_owned(),
            full_name: Some(email.split('@').next().unwrap_or(email).to_owned()),
            avatar_url: None,
        })
        .await
        .expect("Failed to insert profile");

    if role == Role::Student {
        return profile;
    }

    store
        .update_role(profile.id, role)
        .await
        .expect("Failed to update role")
        .expect("profile vanished")
}

pub async fn seed_course(store: &DatabaseStore, created_by: UserId, title: &str) -> CourseModel {
    store
        .insert_course(
            created_by,
            NewCourse {
                title: title.to_owned(),
                description: None,
                category: CourseCategory::Programming,
                thumbnail_url: None,
                tags: vec!["rust".to_owned()],
                published: true,
            },
        )
        .await
        .expect("Failed to insert course")
}

pub async fn seed_section(
    store: &DatabaseStore,
    course_id: CourseId,
    name: &str,
    order_index: i32,
) -> SectionModel {
    store
        .insert_section(course_id, name.to_owned(), order_index)
        .await
        .expect("Failed to insert section")
}

pub async fn seed_video(
    store: &DatabaseStore,
    section_id: SectionId,
    title: &str,
    order_index: i32,
) -> VideoModel {
    store
        .insert_video(
            section_id,
            NewVideo {
                title: title.to_owned(),
                description: None,
                video_url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_owned(),
                duration: Some(600),
                order_index: None,
            },
            order_index,
        )
        .await
        .expect("Failed to insert video")
}

/// A course with one section of `videos` videos, authored by `owner`.
pub async fn seed_course_with_videos(
    store: &DatabaseStore,
    owner: UserId,
    title: &str,
    videos: usize,
) -> (CourseModel, Vec<VideoModel>) {
    let course = seed_course(store, owner, title).await;
    let section = seed_section(store, course.id, "Basics", 0).await;

    let mut seeded = Vec::with_capacity(videos);
    for index in 0..videos {
        seeded.push(seed_video(store, section.id, &format!("Lesson {index}"), index as i32).await);
    }

    (course, seeded)
}

pub fn identity_for(user_id: UserId) -> Arc<LocalIdentity> {
    Arc::new(LocalIdentity::signed_in(user_id))
}

pub fn anonymous() -> Arc<LocalIdentity> {
    Arc::new(LocalIdentity::new())
}
