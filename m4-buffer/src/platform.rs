//! Binary-mode stdio setup.
//!
//! On Unix there is no text/binary distinction, so this is a no-op. On
//! Windows, the CRT opens stdin/stdout in text mode by default, which
//! translates `\n` to `\r\n` and treats `0x1a` as an end-of-file marker —
//! both of which corrupt diversion output. `_setmode` with `_O_BINARY`
//! switches a file descriptor out of that translation.

/// Puts stdin and stdout into binary mode. A no-op outside Windows.
pub fn set_stdio_binary_mode() {
    #[cfg(windows)]
    {
        const STDIN_FD: i32 = 0;
        const STDOUT_FD: i32 = 1;
        unsafe {
            libc::_setmode(STDIN_FD, libc::O_BINARY);
            libc::_setmode(STDOUT_FD, libc::O_BINARY);
        }
    }
}
