use std::{env, ffi::OsStr};


fn set_env_var(key: &str, val: &str) {
    unsafe {
        env::set_var(&OsStr::new(key), val);
    }
}
