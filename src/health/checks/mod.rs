//! Built-in diagnostic checks, in required execution order

pub mod driver;
pub mod gl_context;
pub mod gpu;
pub mod opengl_info;

pub use driver::DriverCompatibilityCheck;
pub use gl_context::{BasicCallsCheck, ContextCreationCheck, FunctionLoadingCheck};
pub use gpu::GpuPresenceCheck;
pub use opengl_info::OpenGLInfoCheck;
