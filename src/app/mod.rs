pub mod ports;
pub mod stage_use_case;
