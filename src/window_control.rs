use anyhow::Result;

/// OS-level styling and visibility of the shell's host window.
pub trait WindowControl {
    fn set_topmost(&mut self, topmost: bool) -> Result<()>;
    fn set_borderless(&mut self, borderless: bool) -> Result<()>;
    /// Tool windows are kept out of Alt+Tab and the taskbar.
    fn set_tool_window(&mut self, tool_window: bool) -> Result<()>;
    /// 0 is fully transparent, 255 fully opaque.
    fn set_transparency(&mut self, alpha: u8) -> Result<()>;
    /// Let mouse input fall through to whatever is under the window.
    fn set_click_through(&mut self, enabled: bool) -> Result<()>;
    /// Force the arrow cursor shape over the window.
    fn set_cursor_lock(&mut self, locked: bool) -> Result<()>;
    fn toggle_visibility(&mut self) -> Result<()>;
}

/// Stand-in used before the host window exists or off Windows.
#[derive(Debug, Default)]
pub struct NoopWindowControl;

impl WindowControl for NoopWindowControl {
    fn set_topmost(&mut self, _topmost: bool) -> Result<()> {
        Ok(())
    }

    fn set_borderless(&mut self, _borderless: bool) -> Result<()> {
        Ok(())
    }

    fn set_tool_window(&mut self, _tool_window: bool) -> Result<()> {
        Ok(())
    }

    fn set_transparency(&mut self, _alpha: u8) -> Result<()> {
        Ok(())
    }

    fn set_click_through(&mut self, _enabled: bool) -> Result<()> {
        Ok(())
    }

    fn set_cursor_lock(&mut self, _locked: bool) -> Result<()> {
        Ok(())
    }

    fn toggle_visibility(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(windows)]
pub use platform::Win32WindowControl;

#[cfg(windows)]
mod platform {
    use super::WindowControl;
    use anyhow::{bail, Context, Result};
    use windows::Win32::Foundation::{COLORREF, HWND, LPARAM, LRESULT, WPARAM};
    use windows::Win32::UI::Shell::{DefSubclassProc, RemoveWindowSubclass, SetWindowSubclass};
    use windows::Win32::UI::WindowsAndMessaging::{
        GetWindowLongW, IsIconic, IsWindowVisible, LoadCursorW, SetCursor,
        SetLayeredWindowAttributes, SetWindowLongW, SetWindowPos, ShowWindow, GWL_EXSTYLE,
        GWL_STYLE, HWND_NOTOPMOST, HWND_TOPMOST, IDC_ARROW, LWA_ALPHA, SWP_FRAMECHANGED,
        SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER, SW_HIDE, SW_RESTORE, SW_SHOW, WINDOW_EX_STYLE,
        WINDOW_STYLE, WM_SETCURSOR, WS_CAPTION, WS_EX_APPWINDOW, WS_EX_LAYERED, WS_EX_TOOLWINDOW,
        WS_EX_TOPMOST, WS_EX_TRANSPARENT, WS_THICKFRAME,
    };

    const CURSOR_LOCK_SUBCLASS_ID: usize = 1;

    unsafe extern "system" fn cursor_lock_proc(
        hwnd: HWND,
        msg: u32,
        w_param: WPARAM,
        l_param: LPARAM,
        _id: usize,
        _data: usize,
    ) -> LRESULT {
        if msg == WM_SETCURSOR {
            if let Ok(arrow) = unsafe { LoadCursorW(None, IDC_ARROW) } {
                unsafe {
                    SetCursor(arrow);
                }
                return LRESULT(1);
            }
        }
        unsafe { DefSubclassProc(hwnd, msg, w_param, l_param) }
    }

    #[derive(Debug, Clone, Copy)]
    pub struct Win32WindowControl {
        hwnd: HWND,
        cursor_locked: bool,
    }

    impl Win32WindowControl {
        pub fn new(hwnd: HWND) -> Self {
            Self {
                hwnd,
                cursor_locked: false,
            }
        }

        fn ex_style(&self) -> WINDOW_EX_STYLE {
            WINDOW_EX_STYLE(unsafe { GetWindowLongW(self.hwnd, GWL_EXSTYLE) } as u32)
        }

        fn set_ex_style(&self, style: WINDOW_EX_STYLE) {
            unsafe {
                SetWindowLongW(self.hwnd, GWL_EXSTYLE, style.0 as i32);
            }
        }

        fn refresh_frame(&self) -> Result<()> {
            unsafe {
                SetWindowPos(
                    self.hwnd,
                    HWND::default(),
                    0,
                    0,
                    0,
                    0,
                    SWP_FRAMECHANGED | SWP_NOMOVE | SWP_NOSIZE | SWP_NOZORDER,
                )
            }
            .context("SetWindowPos failed to refresh the frame")
        }
    }

    impl WindowControl for Win32WindowControl {
        fn set_topmost(&mut self, topmost: bool) -> Result<()> {
            let insert_after = if topmost { HWND_TOPMOST } else { HWND_NOTOPMOST };
            unsafe { SetWindowPos(self.hwnd, insert_after, 0, 0, 0, 0, SWP_NOMOVE | SWP_NOSIZE) }
                .context("SetWindowPos failed to change topmost state")
        }

        fn set_borderless(&mut self, borderless: bool) -> Result<()> {
            let style = WINDOW_STYLE(unsafe { GetWindowLongW(self.hwnd, GWL_STYLE) } as u32);
            let frame = WS_CAPTION | WS_THICKFRAME;
            let style = if borderless {
                style & !frame
            } else {
                style | frame
            };
            unsafe {
                SetWindowLongW(self.hwnd, GWL_STYLE, style.0 as i32);
            }
            self.refresh_frame()
        }

        fn set_tool_window(&mut self, tool_window: bool) -> Result<()> {
            let style = self.ex_style();
            let style = if tool_window {
                (style | WS_EX_TOOLWINDOW) & !WS_EX_APPWINDOW
            } else {
                (style & !WS_EX_TOOLWINDOW) | WS_EX_APPWINDOW
            };
            self.set_ex_style(style);
            self.refresh_frame()
        }

        fn set_transparency(&mut self, alpha: u8) -> Result<()> {
            self.set_ex_style(self.ex_style() | WS_EX_LAYERED);
            unsafe { SetLayeredWindowAttributes(self.hwnd, COLORREF(0), alpha, LWA_ALPHA) }
                .context("SetLayeredWindowAttributes failed")
        }

        fn set_click_through(&mut self, enabled: bool) -> Result<()> {
            let style = self.ex_style();
            let style = if enabled {
                style | WS_EX_LAYERED | WS_EX_TRANSPARENT
            } else {
                style & !WS_EX_TRANSPARENT
            };
            self.set_ex_style(style);
            Ok(())
        }

        fn set_cursor_lock(&mut self, locked: bool) -> Result<()> {
            if locked == self.cursor_locked {
                return Ok(());
            }
            // Must run on the thread that owns the window.
            let ok = unsafe {
                if locked {
                    SetWindowSubclass(self.hwnd, Some(cursor_lock_proc), CURSOR_LOCK_SUBCLASS_ID, 0)
                } else {
                    RemoveWindowSubclass(self.hwnd, Some(cursor_lock_proc), CURSOR_LOCK_SUBCLASS_ID)
                }
            };
            if !ok.as_bool() {
                bail!("failed to change cursor lock on the host window");
            }
            self.cursor_locked = locked;
            Ok(())
        }

        fn toggle_visibility(&mut self) -> Result<()> {
            unsafe {
                if IsWindowVisible(self.hwnd).as_bool() {
                    let _ = ShowWindow(self.hwnd, SW_HIDE);
                    return Ok(());
                }
                if IsIconic(self.hwnd).as_bool() {
                    let _ = ShowWindow(self.hwnd, SW_RESTORE);
                }
            }

            // Raise above other windows once, then drop back unless the user
            // asked for topmost.
            let topmost = (self.ex_style() & WS_EX_TOPMOST) != WINDOW_EX_STYLE(0);
            if !topmost {
                self.set_topmost(true)?;
            }
            unsafe {
                let _ = ShowWindow(self.hwnd, SW_SHOW);
            }
            if !topmost {
                self.set_topmost(false)?;
            }
            Ok(())
        }
    }
}
