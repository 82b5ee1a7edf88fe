pub mod png_snapshot_sink;
