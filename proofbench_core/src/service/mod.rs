pub mod comments;
pub mod courses;
pub mod profiles;
pub mod progress;

pub use comments::{CommentsService, CommentsServiceError};
pub use courses::{CourseOutline, CoursesService, CoursesServiceError, SectionOutline, VideoEntry};
pub use profiles::{ProfilesService, ProfilesServiceError};
pub use progress::{ProgressService, ProgressServiceError};
