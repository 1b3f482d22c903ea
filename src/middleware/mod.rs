mod actor;

pub use actor::{Actor, ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
