/// Backend payload types (manually entered from the REST contract)
use anyhow::anyhow;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    Facebook,
    Instagram,
    Linkedin,
    Tiktok,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Twitter,
        Platform::Facebook,
        Platform::Instagram,
        Platform::Linkedin,
        Platform::Tiktok,
    ];

    /// Name used in URL paths and JSON bodies
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::Linkedin => "linkedin",
            Platform::Tiktok => "tiktok",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Twitter => "Twitter / X",
            Platform::Facebook => "Facebook",
            Platform::Instagram => "Instagram",
            Platform::Linkedin => "LinkedIn",
            Platform::Tiktok => "TikTok",
        }
    }
}

impl FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "twitter" | "x" => Ok(Platform::Twitter),
            "facebook" => Ok(Platform::Facebook),
            "instagram" => Ok(Platform::Instagram),
            "linkedin" => Ok(Platform::Linkedin),
            "tiktok" => Ok(Platform::Tiktok),
            _ => Err(anyhow!("unknown platform: {}", s)),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[allow(non_snake_case)]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub fullName: String,
    pub avatar: Option<String>,
    pub createdAt: String,
}

#[allow(non_snake_case)]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct AuthTokens {
    pub accessToken: String,
    pub refreshToken: String,
}

/// Body of both the login and register responses
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub user: User,
    pub tokens: AuthTokens,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[allow(non_snake_case)]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct RegisterData {
    pub email: String,
    pub username: String,
    pub fullName: String,
    pub password: String,
}

#[allow(non_snake_case)]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    pub refreshToken: String,
}

#[allow(non_snake_case)]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct SocialAccount {
    pub id: String,
    pub platform: Platform,
    pub platformUserId: String,
    pub username: String,
    pub displayName: String,
    pub profilePicture: Option<String>,
    pub isActive: bool,
    pub connectedAt: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[allow(non_snake_case)]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct ConnectResponse {
    pub authUrl: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct OAuthCallbackRequest {
    pub code: String,
    pub state: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Published,
    Failed,
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PostStatus::Draft => "draft",
            PostStatus::Scheduled => "scheduled",
            PostStatus::Published => "published",
            PostStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

#[allow(non_snake_case)]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    pub content: String,
    pub platforms: Vec<Platform>,
    pub mediaUrls: Option<Vec<String>>,
    pub scheduledFor: Option<String>,
    pub publishedAt: Option<String>,
    pub status: PostStatus,
    pub authorId: String,
    pub createdAt: String,
    pub updatedAt: String,
}

/// Body of `POST /posts`. Absent fields are left out of the JSON entirely.
#[allow(non_snake_case)]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq, Default)]
pub struct CreatePost {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selectedPlatforms: Option<Vec<Platform>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mediaUrls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduledFor: Option<String>,
}

#[allow(non_snake_case)]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct SchedulePost {
    pub scheduledFor: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub url: String,
}

#[allow(non_snake_case)]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub id: String,
    pub platform: Platform,
    pub platformPostId: String,
    pub content: String,
    pub authorName: String,
    pub authorUsername: String,
    pub authorAvatar: Option<String>,
    pub mediaUrls: Option<Vec<String>>,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub publishedAt: String,
    pub url: String,
}

#[allow(non_snake_case)]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct PostMetrics {
    pub postId: String,
    pub platform: Platform,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub impressions: u64,
    pub engagement: f64,
}

#[allow(non_snake_case)]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct PlatformStats {
    pub platform: Platform,
    pub followers: u64,
    pub totalPosts: u64,
    pub totalEngagement: u64,
    pub avgEngagementRate: f64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

#[allow(non_snake_case)]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub createdAt: String,
    pub actionUrl: Option<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: u32,
    pub limit: u32,
}

impl PaginationParams {
    pub fn new(page: u32, limit: u32) -> Self {
        PaginationParams { page, limit }
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ]
    }
}

#[allow(non_snake_case)]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub hasMore: bool,
}

impl<T> PaginatedResponse<T> {
    /// Parameters for the following page, or `None` once the backend says there is nothing more
    pub fn next_page(&self) -> Option<PaginationParams> {
        self.page
            .checked_add(1)
            .filter(|_| self.hasMore)
            .map(|page| PaginationParams::new(page, self.limit))
    }
}

/// Error envelope the backend uses for non-success responses
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct ApiErrorBody {
    pub message: String,
    pub code: Option<String>,
    pub details: Option<Value>,
}

#[test]
fn test_platform() {
    assert_eq!(Platform::from_str("twitter").unwrap(), Platform::Twitter);
    assert_eq!(Platform::from_str("LinkedIn").unwrap(), Platform::Linkedin);
    assert_eq!(Platform::from_str("x").unwrap(), Platform::Twitter);
    assert!(Platform::from_str("myspace").is_err());
    assert!(Platform::from_str("").is_err());

    for p in Platform::ALL {
        assert_eq!(Platform::from_str(&p.to_string()).unwrap(), p);
    }
    assert_eq!(
        serde_json::to_value(Platform::Tiktok).unwrap(),
        serde_json::json!("tiktok")
    );
}

#[test]
fn test_create_post_omits_absent_fields() {
    let req = CreatePost {
        content: Some("hello".to_string()),
        selectedPlatforms: Some(vec![Platform::Twitter]),
        ..Default::default()
    };
    assert_eq!(
        serde_json::to_value(&req).unwrap(),
        serde_json::json!({"content": "hello", "selectedPlatforms": ["twitter"]})
    );
}

#[test]
fn test_notification_decode() {
    let n: Notification = serde_json::from_value(serde_json::json!({
        "id": "n1",
        "type": "warning",
        "title": "Token expiring",
        "message": "Reconnect your Instagram account",
        "read": false,
        "createdAt": "2024-03-01T10:00:00Z",
    }))
    .unwrap();
    assert_eq!(n.kind, NotificationKind::Warning);
    assert!(n.actionUrl.is_none());
}

#[test]
fn test_next_page() {
    let resp: PaginatedResponse<FeedItem> = PaginatedResponse {
        data: vec![],
        total: 25,
        page: 2,
        limit: 10,
        hasMore: true,
    };
    assert_eq!(resp.next_page(), Some(PaginationParams::new(3, 10)));
    let last = PaginatedResponse::<FeedItem> {
        hasMore: false,
        ..resp
    };
    assert_eq!(last.next_page(), None);

    let end: PaginatedResponse<FeedItem> = serde_json::from_str(
        r#"{"data": [], "total": 0, "page": 4294967295, "limit": 10, "hasMore": true}"#,
    )
    .unwrap();
    assert_eq!(end.next_page(), None);
}
