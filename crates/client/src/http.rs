//! `reqwest`-backed implementation of the course API traits.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use course_core::model::{
    ChapterId, ChapterSnapshot, Course, CourseId, CourseSummary, CourseUpdate, DocumentId,
    ImageId, NewCourse,
};

use crate::api::{Account, AuthApi, AuthToken, CourseApi, CourseCatalog, Credentials, NewAccount};
use crate::config::ClientConfig;
use crate::dto::{
    AccountPayload, ChapterPayload, CoursePayload, CourseSummaryPayload, CreatedCoursePayload,
    QuestionPayload, TokenPayload, UploadPayload,
};
use crate::error::ApiError;

/// HTTP client for the course backend.
///
/// Cheap to clone; holds a connection pool internally.
#[derive(Clone)]
pub struct HttpCourseApi {
    client: Client,
    config: ClientConfig,
}

impl HttpCourseApi {
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Use a preconfigured `reqwest::Client` (timeouts, proxies).
    #[must_use]
    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        Self { client, config }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self.client.request(method, self.config.endpoint(path));
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::from_status(status));
        }
        Ok(response.json().await?)
    }

    async fn send_expect_ok(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::from_status(status));
        }
        Ok(())
    }

    async fn upload(&self, path: &str, file_name: &str, bytes: Vec<u8>) -> Result<u64, ApiError> {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("file", part);
        let payload: UploadPayload = self
            .send_json(self.request(Method::POST, path).multipart(form))
            .await?;
        Ok(payload.id)
    }
}

#[async_trait]
impl CourseApi for HttpCourseApi {
    async fn fetch_course(&self, course_id: CourseId) -> Result<Course, ApiError> {
        let payload: CoursePayload = self
            .send_json(self.request(Method::GET, &format!("/courses/{course_id}")))
            .await?;
        payload.into_course()
    }

    async fn fetch_chapters(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<ChapterSnapshot>, ApiError> {
        let payload: Vec<ChapterPayload> = self
            .send_json(self.request(Method::GET, &format!("/courses/{course_id}/chapters")))
            .await?;
        Ok(payload.into_iter().map(ChapterPayload::into_snapshot).collect())
    }

    async fn fetch_chapter_question_count(
        &self,
        course_id: CourseId,
        chapter_id: ChapterId,
    ) -> Result<usize, ApiError> {
        let questions: Vec<QuestionPayload> = self
            .send_json(self.request(
                Method::GET,
                &format!("/courses/{course_id}/chapters/{chapter_id}/questions"),
            ))
            .await?;
        Ok(questions.len())
    }
}

#[async_trait]
impl CourseCatalog for HttpCourseApi {
    async fn list_my_courses(&self) -> Result<Vec<CourseSummary>, ApiError> {
        let payload: Vec<CourseSummaryPayload> = self
            .send_json(self.request(Method::GET, "/courses/my"))
            .await?;
        payload
            .into_iter()
            .map(CourseSummaryPayload::into_summary)
            .collect()
    }

    async fn list_public_courses(&self) -> Result<Vec<CourseSummary>, ApiError> {
        let payload: Vec<CourseSummaryPayload> = self
            .send_json(self.request(Method::GET, "/courses/public"))
            .await?;
        payload
            .into_iter()
            .map(CourseSummaryPayload::into_summary)
            .collect()
    }

    async fn create_course(&self, draft: &NewCourse) -> Result<CourseId, ApiError> {
        let payload: CreatedCoursePayload = self
            .send_json(self.request(Method::POST, "/courses").json(draft))
            .await?;
        Ok(CourseId::new(payload.course_id))
    }

    async fn update_course(
        &self,
        course_id: CourseId,
        update: &CourseUpdate,
    ) -> Result<Course, ApiError> {
        let payload: CoursePayload = self
            .send_json(
                self.request(Method::PATCH, &format!("/courses/{course_id}"))
                    .json(update),
            )
            .await?;
        payload.into_course()
    }

    async fn delete_course(&self, course_id: CourseId) -> Result<(), ApiError> {
        self.send_expect_ok(self.request(Method::DELETE, &format!("/courses/{course_id}")))
            .await
    }

    async fn upload_document(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<DocumentId, ApiError> {
        self.upload("/documents", file_name, bytes)
            .await
            .map(DocumentId::new)
    }

    async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<ImageId, ApiError> {
        self.upload("/images", file_name, bytes).await.map(ImageId::new)
    }
}

#[async_trait]
impl AuthApi for HttpCourseApi {
    async fn login(&self, credentials: &Credentials) -> Result<AuthToken, ApiError> {
        let payload: TokenPayload = self
            .send_json(self.request(Method::POST, "/auth/login").json(&LoginRequest {
                username: &credentials.username,
                password: &credentials.password,
            }))
            .await?;
        Ok(AuthToken::new(payload.access_token))
    }

    async fn register(&self, account: &NewAccount) -> Result<AuthToken, ApiError> {
        let payload: TokenPayload = self
            .send_json(
                self.request(Method::POST, "/auth/register")
                    .json(&RegisterRequest {
                        username: &account.username,
                        email: &account.email,
                        password: &account.password,
                    }),
            )
            .await?;
        Ok(AuthToken::new(payload.access_token))
    }

    async fn current_user(&self) -> Result<Account, ApiError> {
        let payload: AccountPayload =
            self.send_json(self.request(Method::GET, "/users/me")).await?;
        Ok(payload.into_account())
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}
