pub mod affect;
pub mod aggregate;
pub mod pipeline;
pub mod scoring;
pub mod session;
