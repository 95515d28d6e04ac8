//! Static HTML served by the portal.

pub const LOGIN: &str = r#"<!doctype html>
<html>
<head><title>WFM Portal - Login</title></head>
<body>
  <h1>Workforce Management Portal</h1>
  <form method="post" action="/login">
    <label for="email">Work email</label>
    <input type="email" id="email" name="email" required>
    <button type="submit">Sign in</button>
  </form>
</body>
</html>
"#;

pub const FORM: &str = r#"<!doctype html>
<html>
<head><title>WFM Portal - New Ticket</title></head>
<body>
  <h1>Submit a WFM Ticket</h1>
  <form method="post" action="/submit" enctype="multipart/form-data">
    <label for="advisor_name">Advisor name</label>
    <input type="text" id="advisor_name" name="advisor_name" required>

    <label for="wfm_request">Request type</label>
    <select id="wfm_request" name="wfm_request" required>
      <option value="Schedule Change">Schedule Change</option>
      <option value="Shift Swap">Shift Swap</option>
      <option value="Time Off">Time Off</option>
      <option value="Other">Other</option>
    </select>

    <label for="details">Details</label>
    <textarea id="details" name="details" rows="5"></textarea>

    <label for="attachment">Attachment</label>
    <input type="file" id="attachment" name="attachment">

    <button type="submit">Submit ticket</button>
  </form>

  <h2>Close a ticket</h2>
  <form method="post" action="/close_ticket">
    <label for="ticket_id">Ticket identifier</label>
    <input type="text" id="ticket_id" name="ticket_id" required>
    <button type="submit">Close ticket</button>
  </form>

  <p><a href="/logout">Log out</a></p>
</body>
</html>
"#;

pub const CONFIRMATION: &str = r#"<!doctype html>
<html>
<head><title>WFM Portal - Ticket Received</title></head>
<body>
  <h1>Ticket received</h1>
  <p>Your WFM ticket has been submitted. You will be notified once it is resolved.</p>
  <p><a href="/">Submit another ticket</a></p>
</body>
</html>
"#;
