use windows_sys::Win32::Foundation::{HANDLE, INVALID_HANDLE_VALUE};
use windows_sys::Win32::System::Console::{
    GetStdHandle, SetConsoleTextAttribute, STD_ERROR_HANDLE, STD_OUTPUT_HANDLE,
};

use super::{ConsoleHandle, NativeConsole, StdStream};

/// kernel32 console API.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsConsole;

impl NativeConsole for WindowsConsole {
    fn std_handle(&self, stream: StdStream) -> Option<ConsoleHandle> {
        let id = match stream {
            StdStream::Output => STD_OUTPUT_HANDLE,
            StdStream::Error => STD_ERROR_HANDLE,
        };
        // SAFETY: GetStdHandle takes a plain id and has no other preconditions.
        let handle = unsafe { GetStdHandle(id) };
        if handle.is_null() || handle == INVALID_HANDLE_VALUE {
            None
        } else {
            Some(ConsoleHandle(handle as isize))
        }
    }

    fn set_text_attribute(&self, handle: ConsoleHandle, attribute: u16) -> bool {
        // SAFETY: the handle came from GetStdHandle; a stale one only makes the call fail.
        unsafe { SetConsoleTextAttribute(handle.0 as HANDLE, attribute) != 0 }
    }
}
