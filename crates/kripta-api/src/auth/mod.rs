//! 인증.
//!
//! 외부 인증 제공자가 발급한 세션 JWT를 검증하고, 요청마다
//! 사용자 행을 upsert하여 현재 사용자를 확정합니다.
//!
//! # 구성 요소
//!
//! - [`Claims`]: JWT 페이로드 구조체
//! - [`JwtAuth`]: Bearer 헤더 또는 세션 쿠키에서 토큰을 검증하는 추출기
//! - [`CurrentUser`]: 검증된 토큰으로 사용자 행을 upsert한 결과
//! - [`AdminUser`]: 관리자 역할을 요구하는 추출기
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn protected_handler(
//!     CurrentUser(user): CurrentUser,
//! ) -> impl IntoResponse {
//!     format!("Hello, {}!", user.display_name())
//! }
//! ```

mod jwt;
mod middleware;
mod user;

pub use jwt::{create_token, decode_token, Claims, JwtError};
pub use middleware::{
    require_role, session_token, JwtAuth, JwtAuthError, JwtConfig, OptionalJwtAuth,
};
pub use user::{AdminUser, CurrentUser, MaybeCurrentUser};
