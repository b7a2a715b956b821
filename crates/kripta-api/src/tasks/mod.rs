//! 백그라운드 태스크 모듈.
//!
//! - 포트폴리오 스냅샷: 지갑을 보유한 사용자의 평가액을 주기적으로 기록

pub mod snapshot;

pub use snapshot::{start_snapshot_task, SnapshotTaskConfig};
