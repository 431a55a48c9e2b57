//! Embedded static assets for the interaction surface.

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Switchboard</title>
  <link rel="stylesheet" href="/style.css">
</head>
<body>
  <h1>Switchboard</h1>
  <p class="lede">
    Ask a question and it is routed to the best-matching agent: a python
    coder, or one of the data agents for cat breeds, dog breeds, student
    sleep patterns, and the healthiest foods.
  </p>

  <section>
    <h2>Python examples</h2>
    <select id="example-select"></select>
    <button id="run-example">Run example</button>
  </section>

  <section>
    <h2>Ask a question</h2>
    <input id="question" type="text" placeholder="What is the average weight of a Persian cat?">
    <button id="ask">Ask</button>
  </section>

  <div id="status" class="hidden">Processing your answer...</div>
  <div id="result" class="hidden"></div>

  <section>
    <h2>History</h2>
    <button id="load-history">Load history</button>
    <pre id="history"></pre>
  </section>

  <script src="/app.js"></script>
</body>
</html>
"#;

pub const STYLE_CSS: &str = r#"body {
  font-family: system-ui, sans-serif;
  max-width: 48rem;
  margin: 2rem auto;
  padding: 0 1rem;
  color: #1a1a1a;
}
h1 { margin-bottom: 0.25rem; }
.lede { color: #555; }
section { margin: 1.5rem 0; }
input[type="text"] {
  width: 70%;
  padding: 0.4rem;
}
button {
  padding: 0.4rem 0.9rem;
  cursor: pointer;
}
#status { color: #777; font-style: italic; margin: 1rem 0; }
#result {
  white-space: pre-wrap;
  background: #f6f6f6;
  border-left: 3px solid #888;
  padding: 0.75rem;
  margin: 1rem 0;
}
#result.error { border-color: #c0392b; color: #c0392b; }
#history {
  background: #f6f6f6;
  padding: 0.75rem;
  overflow-x: auto;
}
.hidden { display: none; }
"#;

pub const APP_JS: &str = r#"const statusEl = document.getElementById('status');
const resultEl = document.getElementById('result');

async function loadExamples() {
  const res = await fetch('/api/examples');
  const prompts = await res.json();
  const select = document.getElementById('example-select');
  for (const prompt of prompts) {
    const opt = document.createElement('option');
    opt.value = prompt;
    opt.textContent = prompt;
    select.appendChild(opt);
  }
}

function showBusy() {
  statusEl.classList.remove('hidden');
  resultEl.classList.add('hidden');
}

function showResult(text, isError) {
  statusEl.classList.add('hidden');
  resultEl.textContent = text;
  resultEl.classList.toggle('error', isError);
  resultEl.classList.remove('hidden');
}

async function submit(url, body) {
  showBusy();
  try {
    const res = await fetch(url, {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(body),
    });
    const data = await res.json();
    if (!res.ok) {
      showResult(data.error || 'Request failed', true);
      return;
    }
    let text = data.answer;
    if (data.historyError) {
      text += '\n\n(history not saved: ' + data.historyError + ')';
    }
    showResult(text, false);
  } catch (err) {
    showResult(String(err), true);
  }
}

document.getElementById('run-example').addEventListener('click', () => {
  const prompt = document.getElementById('example-select').value;
  submit('/api/example', { prompt });
});

document.getElementById('ask').addEventListener('click', () => {
  const question = document.getElementById('question').value;
  submit('/api/ask', { question });
});

document.getElementById('load-history').addEventListener('click', async () => {
  const res = await fetch('/api/history');
  if (!res.ok) {
    document.getElementById('history').textContent = 'Failed to load history';
    return;
  }
  const lines = await res.json();
  document.getElementById('history').textContent =
    lines.length ? lines.join('\n') : '(empty)';
});

loadExamples();
"#;
