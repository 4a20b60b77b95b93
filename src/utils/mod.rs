pub mod waypoint_spec;
