#![cfg(target_arch = "wasm32")]

use wasm_bindgen::prelude::*;

use crate::{Scheduler, Task};

#[wasm_bindgen]
extern "C" {
	#[wasm_bindgen(js_name = queueMicrotask)]
	fn queue_microtask(closure: &JsValue);
}

/// Schedules flushes on the browser's microtask queue.
#[derive(Clone, Copy, Default, Debug)]
pub struct Microtask;

impl Scheduler for Microtask {
	fn schedule(&self, task: Task) {
		queue_microtask(&Closure::once_into_js(task));
	}
}
