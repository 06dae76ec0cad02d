use crate::compositor::{ClipRegion, EmbeddedSurface, SurfaceRegion};
use crate::geometry::Rect;
use anyhow::{anyhow, Context, Result};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{HWND, RECT};
use windows::Win32::Graphics::Gdi::{
    CombineRgn, CreateRectRgn, DeleteObject, SetWindowRgn, HRGN, RGN_DIFF, RGN_ERROR,
};
use windows::Win32::UI::WindowsAndMessaging::{FindWindowExW, GetClientRect, IsWindow};

/// GDI region released on drop unless handed to the system.
struct OwnedRegion(HRGN);

impl OwnedRegion {
    fn rect(rect: Rect) -> Result<Self> {
        let hrgn = unsafe { CreateRectRgn(rect.left, rect.top, rect.right, rect.bottom) };
        if hrgn.is_invalid() {
            return Err(anyhow!("CreateRectRgn failed for {rect:?}"));
        }
        Ok(Self(hrgn))
    }

    fn subtract(&mut self, hole: &OwnedRegion) -> Result<()> {
        if unsafe { CombineRgn(self.0, self.0, hole.0, RGN_DIFF) } == RGN_ERROR {
            return Err(anyhow!("CombineRgn failed"));
        }
        Ok(())
    }

    fn handle(&self) -> HRGN {
        self.0
    }

    /// Give up ownership after `SetWindowRgn` accepted the region.
    fn into_system(self) {
        std::mem::forget(self);
    }
}

impl Drop for OwnedRegion {
    fn drop(&mut self) {
        unsafe {
            let _ = DeleteObject(self.0);
        }
    }
}

fn build_region(clip: &ClipRegion) -> Result<OwnedRegion> {
    let mut region = OwnedRegion::rect(clip.bounds)?;
    for hole in &clip.holes {
        let hole = OwnedRegion::rect(*hole)?;
        region.subtract(&hole)?;
    }
    Ok(region)
}

fn client_rect(hwnd: HWND) -> Result<Rect> {
    let mut rect = RECT::default();
    unsafe { GetClientRect(hwnd, &mut rect) }.context("GetClientRect failed")?;
    Ok(Rect::new(rect.left, rect.top, rect.right, rect.bottom))
}

/// Native child window of the browser control, hosted inside the shell window.
#[derive(Debug, Clone, Copy)]
pub struct Win32Surface {
    host: HWND,
    surface: HWND,
}

impl Win32Surface {
    pub fn new(host: HWND, surface: HWND) -> Self {
        Self { host, surface }
    }

    /// First child of `host` whose window class is `class_name`.
    pub fn find_child(host: HWND, class_name: &str) -> Option<Self> {
        let class: Vec<u16> = class_name.encode_utf16().chain(std::iter::once(0)).collect();
        let surface = unsafe {
            FindWindowExW(host, HWND::default(), PCWSTR(class.as_ptr()), PCWSTR::null())
        }
        .ok()?;
        if surface.0.is_null() {
            return None;
        }
        Some(Self::new(host, surface))
    }

    pub fn is_alive(&self) -> bool {
        unsafe { IsWindow(self.surface).as_bool() }
    }

    pub fn host_bounds(&self) -> Result<Rect> {
        client_rect(self.host)
    }

    pub fn surface_bounds(&self) -> Result<Rect> {
        client_rect(self.surface)
    }
}

impl EmbeddedSurface for Win32Surface {
    fn set_region(&mut self, region: &SurfaceRegion) -> Result<()> {
        match region {
            SurfaceRegion::Full => {
                if unsafe { SetWindowRgn(self.surface, HRGN::default(), true) } == 0 {
                    return Err(anyhow!("SetWindowRgn failed to clear the region"));
                }
            }
            SurfaceRegion::Clipped(clip) => {
                let region = build_region(clip)?;
                if unsafe { SetWindowRgn(self.surface, region.handle(), true) } == 0 {
                    return Err(anyhow!("SetWindowRgn failed"));
                }
                region.into_system();
            }
        }
        Ok(())
    }
}
