//! Default value functions for serde deserialization.

pub fn grid_size() -> usize {
    2000
}

pub fn undo_capacity() -> usize {
    160
}

pub fn cell_size() -> i32 {
    4
}

pub fn view_width() -> i32 {
    800
}

pub fn view_height() -> i32 {
    600
}

pub fn enabled() -> bool {
    true
}

pub fn playback_speed() -> usize {
    10
}

pub fn host() -> String {
    "127.0.0.1".to_string()
}

pub fn control_port() -> u16 {
    5600
}

pub fn log_level() -> String {
    "info".to_string()
}

pub fn enabled_sonars() -> [bool; 16] {
    [true; 16]
}

pub fn region_i_halfwidth() -> i32 {
    100
}

pub fn beta() -> i32 {
    15
}

pub fn alpha_factor() -> f32 {
    1.0
}

pub fn max_occupied() -> f32 {
    0.98
}

pub fn max_empty() -> f32 {
    1.0
}

pub fn out_of_range_conversion() -> i32 {
    1500
}

pub fn obstructed_certainty() -> f32 {
    0.7
}

pub fn mapper_cell_size() -> i32 {
    100
}

pub fn local_map_distance() -> i32 {
    5000
}

pub fn motion_min_width() -> i32 {
    15
}

pub fn unit_distance() -> i32 {
    500
}

pub fn unit_turn() -> i32 {
    10
}

pub fn gauss_sigma() -> f32 {
    5.0
}
