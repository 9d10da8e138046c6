pub mod crown_chin;
pub mod print_helper;
