pub mod task;

pub use task::{
    GenerateDescriptionRequest, GenerateDescriptionResponse, NewTask, Priority, Task, TaskPatch,
};
