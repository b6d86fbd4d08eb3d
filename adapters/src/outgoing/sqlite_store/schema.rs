pub const CREATE_TILES: &str = r"
CREATE TABLE IF NOT EXISTS tiles (
    x INTEGER NOT NULL,
    y INTEGER NOT NULL,
    color_id INTEGER NOT NULL,
    place_time INTEGER NOT NULL,
    last_modifier TEXT NOT NULL,
    PRIMARY KEY (x, y)
)";

pub const CREATE_USERS: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    display_name TEXT NOT NULL,
    has_set_username INTEGER NOT NULL,
    is_shadow_banned INTEGER NOT NULL,
    cl_last_event_sec INTEGER NOT NULL,
    cl_last_event_usec INTEGER NOT NULL,
    cl_current_allowance REAL NOT NULL,
    cl_max_rate REAL NOT NULL,
    cl_per_seconds REAL NOT NULL,
    tl_last_event_sec INTEGER NOT NULL,
    tl_last_event_usec INTEGER NOT NULL,
    tl_current_allowance REAL NOT NULL,
    tl_max_rate REAL NOT NULL,
    tl_per_seconds REAL NOT NULL,
    remaining INTEGER NOT NULL,
    max_tiles INTEGER NOT NULL,
    regen_seconds INTEGER NOT NULL,
    total_placed INTEGER NOT NULL,
    level INTEGER NOT NULL,
    progress_in_level INTEGER NOT NULL,
    tiles_to_next_level INTEGER NOT NULL,
    last_connected INTEGER NOT NULL,
    last_event INTEGER NOT NULL
)";

pub const CREATE_HOSTS: &str = r"
CREATE TABLE IF NOT EXISTS hosts (
    address TEXT PRIMARY KEY,
    total_accounts INTEGER NOT NULL
)";
